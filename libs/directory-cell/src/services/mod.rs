pub mod fees;

pub use fees::FeeConfigService;
