mod booking;
mod message;
mod profile;
mod ride;

pub use booking::{Booking, Decision, Party, Status};
pub use message::Message;
pub use profile::{Profile, ProfileUpdate};
pub use ride::{NewRide, Ride, RideQuery, RideSummary};
