use diesel::result::Error as DieselError;
use diesel::ConnectionError;
use diesel_migrations::RunMigrationsError;
use std::io::Error as IOError;
use std::num::ParseIntError;
use url::ParseError as URLError;

use err_derive::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(display = "std::io failure")]
    IO(#[error(source)] IOError),
    #[error(display = "Cannot parse number")]
    ParseInt(#[error(source)] ParseIntError),
    #[error(display = "Diesel failure")]
    Diesel(#[error(source)] DieselError),
    #[error(display = "Cannot connect to database")]
    Connection(#[error(source)] ConnectionError),
    #[error(display = "Database migration failure")]
    Migration(#[error(source)] RunMigrationsError),
    #[error(display = "HTTP request failure")]
    Http(#[error(source)] Box<ureq::Error>),
    #[error(display = "URL parse error")]
    URL(#[error(source)] URLError),
    #[error(display = "Archive listing is unavailable: {}", _0)]
    IndexUnavailable(Box<Error>),
    #[error(
        display = "Archive listing ended after {} entries without reaching comic 1",
        entries
    )]
    IndexIncomplete { entries: usize },
    #[error(display = "Expected element {} not found in page", _0)]
    MissingElement(&'static str),
    #[error(display = "{}", _0)]
    StaticStr(&'static str),
}

impl From<&'static str> for Error {
    fn from(s: &'static str) -> Self {
        Self::StaticStr(s)
    }
}

impl Error {
    /// Whether a single comic's failure may be skipped, leaving the comic for
    /// the next run. Run-level failures (index resolution, progress marker
    /// writes) never go through this check and always abort.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::IO(_)
                | Self::ParseInt(_)
                | Self::Diesel(_)
                | Self::Http(_)
                | Self::URL(_)
                | Self::MissingElement(_)
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
