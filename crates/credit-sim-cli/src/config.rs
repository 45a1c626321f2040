use credit_sim_core::amortization::product::ProductParameters;
use log::info;
use std::fs;

/// Load product parameters from a JSON or YAML file, or fall back to the
/// built-in product table. Missing keys keep their defaults.
pub fn load_product_parameters(
    path: Option<&str>,
) -> Result<ProductParameters, Box<dyn std::error::Error>> {
    let params = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read product config '{}': {}", path, e))?;
            // YAML is a superset of JSON, so one parser covers both
            let params: ProductParameters = serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse product config '{}': {}", path, e))?;
            info!("loaded product parameters from {}", path);
            params
        }
        None => ProductParameters::default(),
    };
    params.validate()?;
    Ok(params)
}
