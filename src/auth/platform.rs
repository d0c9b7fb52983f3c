use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The marketplace itself, the resource guarding platform-level actions:
/// offering a ride and requesting a booking.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Platform {
    id: Uuid,
    name: String,
}

impl Platform {
    pub fn marketplace() -> Self {
        Self {
            id: Uuid::nil(),
            name: "ridepool".into(),
        }
    }
}

impl PolarClass for Platform {
    fn get_polar_class_builder() -> oso::ClassBuilder<Platform> {
        oso::Class::builder()
            .name("Platform")
            .add_attribute_getter("id", |recv: &Platform| recv.id.clone())
            .add_attribute_getter("name", |recv: &Platform| recv.name.clone())
            .add_class_method("marketplace", Platform::marketplace)
    }

    fn get_polar_class() -> oso::Class {
        let builder = Platform::get_polar_class_builder();
        builder.build()
    }
}

#[test]
fn marketplace_is_a_stable_singleton() {
    let platform = Platform::marketplace();

    assert_eq!(platform.id, Uuid::nil());
    assert_eq!(platform.name, "ridepool");
}
