pub mod bookings;
pub mod events;
pub mod messages;
pub mod profiles;
pub mod rides;
