// Filter queries against the backing store.
//
// `$1` is always the shard identifier and `$2` the class tag; both are bound
// parameters, the text below is the complete statement.

/// Endpoint rows for the scrape-target shape.
pub const ENDPOINTS_BY_SHARD_AND_CLASS: &str =
  "SELECT host, port, path, labels FROM public.prometheus WHERE shardid = $1 AND type = $2";

/// Rows for the Consul-style shape.
pub const CONSUL_CONFIGS_BY_SHARD_AND_CLASS: &str =
  "SELECT server, services, tags, datacenter, token FROM public.metrics WHERE shardid = $1 AND type = $2";

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn filters_are_positional_parameters() {
    for statement in [ENDPOINTS_BY_SHARD_AND_CLASS, CONSUL_CONFIGS_BY_SHARD_AND_CLASS] {
      assert!(statement.ends_with("WHERE shardid = $1 AND type = $2"));
      assert!(!statement.contains('\''));
    }
  }
}
