pub mod availability;
pub mod booking;
pub mod lifecycle;
pub mod pricing;

pub use availability::AvailabilityService;
pub use booking::BookingService;
pub use lifecycle::LifecycleService;
pub use pricing::PricingService;
