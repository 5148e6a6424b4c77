#[cfg_attr(not(feature = "hydrate"), allow(dead_code))]
const TOKEN_KEY: &str = "token";

/// Reads the bearer token the login flow left in localStorage.
/// Returns None on the server and when the token is missing or blank.
pub fn get_auth_token() -> Option<String> {
    #[cfg(feature = "hydrate")]
    {
        use wasm_bindgen::prelude::*;

        #[wasm_bindgen]
        extern "C" {
            #[wasm_bindgen(js_namespace = localStorage)]
            fn getItem(key: &str) -> Option<String>;
        }

        getItem(TOKEN_KEY).filter(|token| !token.trim().is_empty())
    }

    #[cfg(not(feature = "hydrate"))]
    {
        None
    }
}
