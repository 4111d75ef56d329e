pub mod allocator;
pub mod booking;
pub mod fees;
pub mod lifecycle;
pub mod locks;
pub mod store;

pub use booking::BookingService;
pub use lifecycle::BookingLifecycleService;
pub use locks::SessionLockRegistry;
pub use store::BookingStore;
