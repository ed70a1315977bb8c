pub mod browse;
pub mod providers;
pub mod ranking;
pub mod recommendations;
pub mod shortlist;

#[cfg(test)]
pub(crate) mod test_server;
