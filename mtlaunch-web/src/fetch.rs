use js_sys::{Reflect, Uint8Array};
use mtlaunch_core::{PackDownload, PackSource};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{ReadableStreamDefaultReader, Request, RequestCredentials, RequestInit, Response};

/// Streams packs over HTTP with `fetch`.
pub struct FetchPackSource;

impl PackSource for FetchPackSource {
    fn fetch(&self, download: PackDownload) {
        spawn_local(stream_pack(download));
    }
}

async fn stream_pack(mut download: PackDownload) {
    match read_body(&mut download).await {
        Ok(()) => {
            if let Err(e) = download.finish() {
                log::error!("{e}");
            }
        }
        Err(e) => download.fail(&describe(&e)),
    }
}

async fn read_body(download: &mut PackDownload) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let init = RequestInit::new();
    init.set_method("GET");
    if download.omit_credentials() {
        init.set_credentials(RequestCredentials::Omit);
    }
    let request = Request::new_with_str_and_init(download.url(), &init)?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!(
            "HTTP {} {} while loading {}",
            response.status(),
            response.status_text(),
            download.url()
        )));
    }

    // Missing when the server streams without a length.
    let length = response
        .headers()
        .get("Content-Length")?
        .and_then(|v| v.parse::<u64>().ok());
    download.set_content_length(length);

    let body = response.body().ok_or("Response has no body")?;
    let reader: ReadableStreamDefaultReader = body.get_reader().dyn_into()?;
    loop {
        let result = JsFuture::from(reader.read()).await?;
        let done = Reflect::get(&result, &"done".into())?.as_bool().unwrap_or(true);
        if done {
            break;
        }
        let value = Reflect::get(&result, &"value".into())?;
        download.push_chunk(Uint8Array::new(&value).to_vec());
    }
    Ok(())
}

fn describe(e: &JsValue) -> String {
    if let Some(err) = e.dyn_ref::<js_sys::Error>() {
        return String::from(err.to_string());
    }
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}
