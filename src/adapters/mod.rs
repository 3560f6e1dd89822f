pub mod audit;
pub mod captcha;
pub mod mail;
