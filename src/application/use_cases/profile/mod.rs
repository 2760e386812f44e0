pub mod change_password;
pub mod update_profile;
