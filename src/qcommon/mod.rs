pub mod cm_disp;
pub mod cm_displeaf;
pub mod cm_load;
pub mod cm_local;
#[cfg(test)]
pub(crate) mod cm_testworld;
pub mod cm_trace;
pub mod cm_tracework;
pub mod cm_visit;
