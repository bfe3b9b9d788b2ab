use crate::components::colors::Rgb;

/// The corner status pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusLight {
    #[default]
    Startup,
    Connecting,
    Online,
    Error,
    DataRefresh,
    DataError,
}

impl StatusLight {
    pub fn color(self) -> Rgb {
        match self {
            StatusLight::Startup => Rgb(0, 0, 128),
            StatusLight::Connecting => Rgb(128, 128, 0),
            StatusLight::Online => Rgb(0, 128, 0),
            StatusLight::Error => Rgb(128, 0, 0),
            StatusLight::DataRefresh => Rgb(0, 128, 128),
            StatusLight::DataError => Rgb(128, 64, 0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusLight::Startup => "starting",
            StatusLight::Connecting => "connecting",
            StatusLight::Online => "online",
            StatusLight::Error => "error",
            StatusLight::DataRefresh => "refreshing",
            StatusLight::DataError => "stale data",
        }
    }
}
