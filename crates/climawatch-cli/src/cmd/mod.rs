pub mod check;
pub mod metrics;
pub mod notify;
pub mod send;
pub mod serve;
pub mod stabilize;
