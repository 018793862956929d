mod config;
mod global;
mod gql;
mod http;
