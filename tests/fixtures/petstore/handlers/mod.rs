/// @router /health [get]
/// @resource ops
/// @success 200 {object} string "service is up"
/// @success 2oo {object} string "typo"
pub fn health() {}

pub fn serve() {}
