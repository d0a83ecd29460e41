pub mod errors;
pub mod order;
pub mod ports;

pub use errors::DomainError;
pub use order::Order;
pub use ports::OrderRepository;
