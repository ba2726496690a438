use crate::models::GenerationParameters;

/// `<base>/prompt/<encoded prompt>?model=..&width=..&height=..&nologo=..[&safe=..]`
///
/// The prompt is encoded as a single path segment: everything outside the
/// unreserved set is escaped, slashes included.
pub fn build_generation_url(base_url: &str, prompt: &str, params: &GenerationParameters) -> String {
    format!(
        "{}/prompt/{}?{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(prompt),
        query_string(params)
    )
}

fn query_string(params: &GenerationParameters) -> String {
    let mut query = format!(
        "model={}&width={}&height={}&nologo={}",
        urlencoding::encode(&params.model),
        params.width,
        params.height,
        params.nologo
    );
    if let Some(safe) = params.safe {
        query.push_str(if safe { "&safe=1" } else { "&safe=0" });
    }
    query
}
