mod barber_profile;
mod shop_profile;
mod user;

pub use barber_profile::BarberProfile;
pub use shop_profile::ShopProfile;
pub use user::{User, UserType};
