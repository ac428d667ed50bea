pub mod etl;
pub mod pipeline;
pub mod resolver;

pub use crate::domain::model::{AddressTable, CountryResult, ResolutionReport};
pub use crate::domain::ports::{ConfigProvider, Geocoder, Pipeline, Storage};
pub use crate::utils::error::Result;
