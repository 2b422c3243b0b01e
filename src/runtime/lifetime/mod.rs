#[cfg(feature = "server")]
pub mod shutdown;
#[cfg(feature = "server")]
pub mod startup;
