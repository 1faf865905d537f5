/// Feed ingestion: fetch, decode, normalize.
///
/// Each feed gets the same three steps. Clients return raw bodies, `wire`
/// turns a body into an element tree, `normalize` maps the tree onto the
/// canonical readings in `model`.
pub mod client;
pub mod normalize;
pub mod wire;

#[cfg(test)]
pub(crate) mod fixtures;
