//! Display state for the home page, fed by sampler events on the UI thread.

use crate::monitor::{MetricEvent, Throughput, Usage};

pub const CPU_IDLE: &str = "Idle";
pub const CPU_BUSY: &str = "Busy";

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    pub cpu_percent: f32,
    /// Empty until the first reading inside the classified ranges.
    pub cpu_status: String,
    pub memory_text: String,
    pub memory_percent: f32,
    pub disk_text: String,
    pub disk_percent: f32,
    pub upload_rate: String,
    pub download_rate: String,
    pub upload_total: String,
    pub download_total: String,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            cpu_percent: 0.0,
            cpu_status: String::new(),
            memory_text: String::new(),
            memory_percent: 0.0,
            disk_text: String::new(),
            disk_percent: 0.0,
            upload_rate: "0.0 B/s".into(),
            download_rate: "0.0 B/s".into(),
            upload_total: String::new(),
            download_total: String::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Presenter {
    state: DisplayState,
}

impl Presenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn apply(&mut self, event: MetricEvent) {
        match event {
            MetricEvent::Cpu(percent) => self.on_cpu_update(percent),
            MetricEvent::Memory(Usage { text, percent }) => self.on_memory_update(text, percent),
            MetricEvent::Disk(Usage { text, percent }) => self.on_disk_update(text, percent),
            MetricEvent::NetworkRate(Throughput { upload, download }) => {
                self.on_network_rate_update(&upload, &download)
            }
            MetricEvent::NetworkTotal(Throughput { upload, download }) => {
                self.on_network_total_update(&upload, &download)
            }
        }
    }

    /// Exactly 0% and anything from 100% up fall outside both ranges and keep
    /// the previous status text. Existing behaviour, kept as is.
    pub fn on_cpu_update(&mut self, percent: f32) {
        self.state.cpu_percent = percent;

        if percent > 0.0 && percent < 50.0 {
            self.state.cpu_status = CPU_IDLE.into();
        } else if (50.0..100.0).contains(&percent) {
            self.state.cpu_status = CPU_BUSY.into();
        }
    }

    pub fn on_memory_update(&mut self, text: String, percent: f32) {
        self.state.memory_text = text;
        self.state.memory_percent = percent;
    }

    pub fn on_disk_update(&mut self, text: String, percent: f32) {
        self.state.disk_text = text;
        self.state.disk_percent = percent;
    }

    pub fn on_network_rate_update(&mut self, upload: &str, download: &str) {
        self.state.upload_rate = format!("{upload}/s");
        self.state.download_rate = format!("{download}/s");
    }

    pub fn on_network_total_update(&mut self, upload: &str, download: &str) {
        self.state.upload_total = format!("total {upload}");
        self.state.download_total = format!("total {download}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_below_half_is_idle() {
        for percent in [0.1, 1.0, 25.0, 49.9] {
            let mut presenter = Presenter::new();
            presenter.on_cpu_update(percent);
            assert_eq!(presenter.state().cpu_status, CPU_IDLE, "at {percent}");
        }
    }

    #[test]
    fn cpu_from_half_to_full_is_busy() {
        for percent in [50.0, 75.0, 99.9] {
            let mut presenter = Presenter::new();
            presenter.on_cpu_update(percent);
            assert_eq!(presenter.state().cpu_status, CPU_BUSY, "at {percent}");
        }
    }

    #[test]
    fn cpu_boundaries_keep_previous_status() {
        let mut presenter = Presenter::new();
        presenter.on_cpu_update(0.0);
        assert_eq!(presenter.state().cpu_status, "");

        presenter.on_cpu_update(30.0);
        presenter.on_cpu_update(0.0);
        assert_eq!(presenter.state().cpu_status, CPU_IDLE);
        assert_eq!(presenter.state().cpu_percent, 0.0);

        presenter.on_cpu_update(100.0);
        assert_eq!(presenter.state().cpu_status, CPU_IDLE);

        presenter.on_cpu_update(60.0);
        presenter.on_cpu_update(100.0);
        presenter.on_cpu_update(150.0);
        assert_eq!(presenter.state().cpu_status, CPU_BUSY);
        assert_eq!(presenter.state().cpu_percent, 150.0);
    }

    #[test]
    fn network_labels_get_suffix_and_prefix() {
        let mut presenter = Presenter::new();
        assert_eq!(presenter.state().upload_rate, "0.0 B/s");

        presenter.apply(MetricEvent::NetworkRate(Throughput {
            upload: "12.3 KB".into(),
            download: "1.0 MB".into(),
        }));
        presenter.apply(MetricEvent::NetworkTotal(Throughput {
            upload: "3.0 GB".into(),
            download: "7.5 GB".into(),
        }));

        let state = presenter.state();
        assert_eq!(state.upload_rate, "12.3 KB/s");
        assert_eq!(state.download_rate, "1.0 MB/s");
        assert_eq!(state.upload_total, "total 3.0 GB");
        assert_eq!(state.download_total, "total 7.5 GB");
    }

    #[test]
    fn usage_is_stored_verbatim_and_latest_wins() {
        let mut presenter = Presenter::new();
        presenter.apply(MetricEvent::Memory(Usage {
            text: "1.0 GB / 8.0 GB".into(),
            percent: 12.5,
        }));
        presenter.apply(MetricEvent::Memory(Usage {
            text: "2.0 GB / 8.0 GB".into(),
            percent: 25.0,
        }));
        presenter.apply(MetricEvent::Disk(Usage {
            text: "50.0 GB / 100.0 GB".into(),
            percent: 50.0,
        }));

        let state = presenter.state();
        assert_eq!(state.memory_text, "2.0 GB / 8.0 GB");
        assert_eq!(state.memory_percent, 25.0);
        assert_eq!(state.disk_text, "50.0 GB / 100.0 GB");
        assert_eq!(state.disk_percent, 50.0);
    }
}
