mod fixtures;
mod query;
