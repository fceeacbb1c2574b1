use std::sync::{Arc, Mutex};

use anyhow::Context as _;
use thiserror::Error;

/// Contenedor de los objetos principales de WGPU que se comparten entre
/// el renderer, los tests y la aplicación host.
///
/// `Device` y `Queue` van en `Arc` porque los comparten los componentes que
/// crean recursos (culler, ring de readback) sin pasar por el `Renderer`.
/// Los errores no capturados del device se guardan en `device_error` y se
/// consultan una vez por frame con [`EngineContext::take_device_error`].
pub struct EngineContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    device_error: Arc<Mutex<Option<String>>>,
}

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("no se pudo obtener un adaptador adecuado")]
    AdapterUnavailable,
    #[error("error al solicitar device: {0}")]
    DeviceRequest(String),
    #[error("device error: {0}")]
    Device(String),
}

impl EngineContext {
    /// Crea un `EngineContext` headless (sin surface), útil para tests y
    /// contextos de render-to-texture puros.
    pub async fn new() -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        Self::new_with_instance(instance, None).await
    }

    /// Crea un `EngineContext` reutilizando una `Instance` ya existente y
    /// opcionalmente asociando una `Surface` compatible.
    pub async fn new_with_instance(
        instance: wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> anyhow::Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await
            .context(ContextError::AdapterUnavailable)?;

        let info = adapter.get_info();
        log::info!("selected adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Instanced Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    ..Default::default()
                },
                None,
            )
            .await
            .map_err(|e| ContextError::DeviceRequest(e.to_string()))?;

        // validation / out-of-memory errors arrive here instead of panicking
        let device_error = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&device_error);
        device.on_uncaptured_error(Box::new(move |err| {
            log::error!("uncaptured wgpu error: {err}");
            if let Ok(mut guard) = slot.lock() {
                guard.get_or_insert_with(|| err.to_string());
            }
        }));

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
            device_error,
        })
    }

    /// Returns (and clears) the first device error reported since the last
    /// call.
    pub fn take_device_error(&self) -> Option<ContextError> {
        let mut guard = match self.device_error.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.take().map(ContextError::Device)
    }

    /// `Ok` when no device error is pending.
    pub fn check_device(&self) -> Result<(), ContextError> {
        match self.take_device_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
