pub mod click;
pub mod short_url;
