pub mod roster_dto;
pub mod view_dto;
