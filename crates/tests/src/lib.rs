pub mod fixtures;

#[cfg(test)]
mod invite_tests;
#[cfg(test)]
mod merge_tests;
