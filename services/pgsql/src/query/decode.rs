use shared::error::{DiscoveryError, Result};
use shared::target::{ConsulServiceRecord, EndpointRecord};
use tokio_postgres::Row;

/// Decode one row of the endpoint query. `index` is the row position, used
/// in the error so skipped rows can be traced back.
pub fn decode_endpoint(index: usize, row: &Row) -> Result<EndpointRecord> {
  let column = |name: &str| text_column(row, name).map_err(|r| DiscoveryError::row_decode(index, r));

  let host = column("host")?;
  let port = column("port")?;
  let path = column("path")?;
  let labels = column("labels")?;

  EndpointRecord::from_columns(index, host, port, path, labels)
}

/// Decode one row of the Consul-shaped query.
pub fn decode_consul(index: usize, row: &Row) -> Result<ConsulServiceRecord> {
  let column = |name: &str| text_column(row, name).map_err(|r| DiscoveryError::row_decode(index, r));
  let array = |name: &str| text_array(row, name).map_err(|r| DiscoveryError::row_decode(index, r));

  ConsulServiceRecord::from_columns(
    index,
    column("server")?,
    array("services")?,
    array("tags")?,
    column("datacenter")?,
    column("token")?,
  )
}

/// Read a nullable text column. Integer columns are accepted and rendered
/// as text, since ports are often stored as numbers.
fn text_column(row: &Row, name: &str) -> std::result::Result<Option<String>, String> {
  let err = match row.try_get::<_, Option<String>>(name) {
    Ok(value) => return Ok(value),
    Err(e) => e,
  };
  if let Ok(value) = row.try_get::<_, Option<i32>>(name) {
    return Ok(value.map(|n| n.to_string()));
  }
  if let Ok(value) = row.try_get::<_, Option<i64>>(name) {
    return Ok(value.map(|n| n.to_string()));
  }
  if let Ok(value) = row.try_get::<_, Option<i16>>(name) {
    return Ok(value.map(|n| n.to_string()));
  }
  Err(format!("column '{name}': {err}"))
}

/// Read a nullable text array. NULL elements are dropped.
fn text_array(row: &Row, name: &str) -> std::result::Result<Option<Vec<String>>, String> {
  row
    .try_get::<_, Option<Vec<Option<String>>>>(name)
    .map(|value| value.map(|items| items.into_iter().flatten().collect()))
    .map_err(|e| format!("column '{name}': {e}"))
}
