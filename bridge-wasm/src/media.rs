//! `<audio>` element media bridge.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    media::{MediaElement, MediaSignal},
};
use wasm_bindgen::{closure::Closure, JsCast};
use wasm_bindgen_futures::JsFuture;

use crate::error::js_error;

/// [`MediaElement`] over an `HTMLAudioElement`.
#[derive(Clone)]
pub struct HtmlAudioMedia {
    element: web_sys::HtmlAudioElement,
}

impl HtmlAudioMedia {
    /// Wrap an existing element.
    pub fn new(element: web_sys::HtmlAudioElement) -> Self {
        Self { element }
    }

    /// Look up an `<audio>` element by id.
    pub fn from_element_id(id: &str) -> BridgeResult<Self> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| BridgeError::NotAvailable("document".into()))?;

        let element = document
            .get_element_by_id(id)
            .ok_or_else(|| BridgeError::NotAvailable(format!("#{id}")))?
            .dyn_into::<web_sys::HtmlAudioElement>()
            .map_err(|_| BridgeError::OperationFailed(format!("#{id} is not an <audio> element")))?;

        Ok(Self::new(element))
    }

    /// Create a detached `<audio>` element.
    pub fn detached() -> BridgeResult<Self> {
        let element =
            web_sys::HtmlAudioElement::new().map_err(|err| js_error("new Audio()", err))?;
        Ok(Self::new(element))
    }

    /// The wrapped element.
    pub fn element(&self) -> &web_sys::HtmlAudioElement {
        &self.element
    }

    /// Forward the element's media events to `on_signal`.
    ///
    /// Listeners stay attached until the returned value is dropped.
    pub fn listen<F>(&self, on_signal: F) -> BridgeResult<MediaSignalListeners>
    where
        F: Fn(MediaSignal) + 'static,
    {
        MediaSignalListeners::attach(&self.element, on_signal)
    }
}

#[async_trait(?Send)]
impl MediaElement for HtmlAudioMedia {
    fn set_src(&self, src: &str) {
        if src.is_empty() {
            // assigning "" resolves to the page URL, so drop the attribute
            let _ = self.element.remove_attribute("src");
        } else {
            self.element.set_src(src);
        }
    }

    fn src(&self) -> String {
        self.element.get_attribute("src").unwrap_or_default()
    }

    fn load(&self) {
        self.element.load();
    }

    async fn play(&self) -> BridgeResult<()> {
        let promise = self.element.play().map_err(|err| js_error("play", err))?;
        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|err| js_error("play", err))
    }

    fn pause(&self) {
        let _ = self.element.pause();
    }

    fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    fn set_current_time(&self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn duration(&self) -> Option<f64> {
        let duration = self.element.duration();
        (duration.is_finite() && duration > 0.0).then_some(duration)
    }

    fn volume(&self) -> f64 {
        self.element.volume()
    }

    fn set_volume(&self, volume: f64) {
        self.element.set_volume(volume.clamp(0.0, 1.0));
    }
}

type Listener = Closure<dyn FnMut(web_sys::Event)>;

/// Event listeners translating media events into [`MediaSignal`]s.
pub struct MediaSignalListeners {
    target: web_sys::EventTarget,
    listeners: Vec<(&'static str, Listener)>,
}

impl MediaSignalListeners {
    fn attach<F>(element: &web_sys::HtmlAudioElement, on_signal: F) -> BridgeResult<Self>
    where
        F: Fn(MediaSignal) + 'static,
    {
        let on_signal = std::rc::Rc::new(on_signal);
        let target: web_sys::EventTarget = element.clone().into();
        let mut listeners = Vec::new();

        let simple: [(&'static str, fn() -> MediaSignal); 4] = [
            ("loadedmetadata", || MediaSignal::MetadataReady),
            ("timeupdate", || MediaSignal::PositionUpdate),
            ("ended", || MediaSignal::Ended),
            ("loadstart", || MediaSignal::LoadStart),
        ];

        for (event, make_signal) in simple {
            let callback = on_signal.clone();
            let listener: Listener = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                callback(make_signal())
            }) as Box<dyn FnMut(web_sys::Event)>);
            target
                .add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
                .map_err(|err| js_error("addEventListener", err))?;
            listeners.push((event, listener));
        }

        let media = element.clone();
        let callback = on_signal.clone();
        let on_error: Listener = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            let message = media
                .error()
                .map(|error| {
                    let detail = error.message();
                    if detail.is_empty() {
                        format!("Media error code {}", error.code())
                    } else {
                        detail
                    }
                })
                .unwrap_or_else(|| "Unknown media error".to_string());
            callback(MediaSignal::Error { message });
        }) as Box<dyn FnMut(web_sys::Event)>);
        target
            .add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())
            .map_err(|err| js_error("addEventListener", err))?;
        listeners.push(("error", on_error));

        Ok(Self { target, listeners })
    }
}

impl Drop for MediaSignalListeners {
    fn drop(&mut self) {
        for (event, listener) in &self.listeners {
            let _ = self
                .target
                .remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
        }
    }
}
