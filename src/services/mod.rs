pub mod access_service;
pub mod identity_service;
pub mod mirror_service;
pub mod profile_service;
pub mod roster_service;
pub mod view_service;
pub mod whop_service;
