pub mod prepare_env;
pub mod seed;
pub mod stub_gateway;
