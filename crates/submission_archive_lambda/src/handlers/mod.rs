pub mod stages;
pub mod submission;

#[cfg(test)]
pub(crate) mod fakes;
