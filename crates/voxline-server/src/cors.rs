use http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use voxline_config::{CorsConfig, Origins};

/// Build a Tower CORS layer from configuration
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new()
        .allow_methods(AllowMethods::any())
        .allow_headers(AllowHeaders::any());

    layer = match &config.origins {
        Origins::Any => layer.allow_origin(AllowOrigin::any()),
        Origins::List(origins) => {
            let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            layer.allow_origin(origins)
        }
    };

    if let Some(duration) = config.max_age_duration() {
        layer = layer.max_age(duration);
    }

    layer
}
