pub mod nsm;
pub mod office;
pub mod prior_authority;
pub mod steps;
