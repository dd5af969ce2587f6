use wasm_bindgen::JsValue;

/// Get the Memory root object from the Screeps global.
pub fn root() -> JsValue {
    js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("Memory")).unwrap_or(JsValue::UNDEFINED)
}

/// Navigate a dotted path (e.g. "_features.squads.persist") in the Memory object.
pub fn path_get(path: &str) -> JsValue {
    let mut current = root();
    for key in path.split('.') {
        if current.is_undefined() || current.is_null() {
            return JsValue::UNDEFINED;
        }
        current = js_sys::Reflect::get(&current, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED);
    }
    current
}

/// Read a string at a dotted path.
pub fn path_string(path: &str) -> Option<String> {
    path_get(path).as_string()
}

/// Set a value at a dotted path in the Memory object. Intermediate objects
/// must already exist.
pub fn path_set(path: &str, value: impl Into<JsValue>) -> Result<(), String> {
    let parts: Vec<&str> = path.split('.').collect();
    let (last_key, parents) = parts.split_last().ok_or("empty memory path")?;

    let mut current = root();
    for key in parents {
        let next = js_sys::Reflect::get(&current, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED);
        if next.is_undefined() || next.is_null() {
            return Err(format!("missing memory object {} in {}", key, path));
        }
        current = next;
    }

    js_sys::Reflect::set(&current, &JsValue::from_str(last_key), &value.into())
        .map(|_| ())
        .map_err(|e| format!("failed to set {}: {:?}", path, e))
}
