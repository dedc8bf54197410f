pub mod impl_fake;
pub mod impl_scripted;
pub mod interface;
