mod error;
mod request;
mod routes;
#[cfg(test)]
pub(crate) mod testing;
mod wrapper;

pub use routes::router;
