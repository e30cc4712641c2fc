//! Test fixtures and helpers.
//!
//! Common setup code for engine and integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use gcrsync_core::ImageId;
use gcrsync_registry::{ImageTransfer, MemoryRegistry, RegistryError, Result};
use gcrsync_sync::Namespaces;

/// Source and target registries with one namespace each.
pub struct MirrorFixture {
    pub source: Arc<MemoryRegistry>,
    pub target: Arc<MemoryRegistry>,
    pub namespaces: Namespaces,
}

impl MirrorFixture {
    pub const SOURCE: &'static str = "google_containers";
    pub const TARGET: &'static str = "gcrxio";

    pub fn new(source: &[&str], target: &[&str]) -> Self {
        Self {
            source: Arc::new(MemoryRegistry::with_images(
                Self::SOURCE,
                source.iter().copied(),
            )),
            target: Arc::new(MemoryRegistry::with_images(
                Self::TARGET,
                target.iter().copied(),
            )),
            namespaces: Namespaces::new(Self::SOURCE, Self::TARGET),
        }
    }

    /// A fixture whose source holds `count` images and whose target is empty.
    pub fn with_backlog(count: usize) -> Self {
        let images = image_names(count);
        let refs: Vec<&str> = images.iter().map(String::as_str).collect();
        Self::new(&refs, &[])
    }

    /// A scripted transfer that delivers into this fixture's target.
    pub fn transfer(&self, delay: Duration) -> ScriptedTransfer {
        ScriptedTransfer::new(delay).deliver_to(Arc::clone(&self.target), Self::TARGET)
    }

    pub fn target_has(&self, image: &str) -> bool {
        self.target.contains(Self::TARGET, &ImageId::from(image))
    }
}

/// `img000:v1`, `img001:v1`, ...
pub fn image_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("img{i:03}:v1")).collect()
}

/// An [`ImageTransfer`] with scripted per-image delays and failures.
///
/// Tracks how many transfers run at once so tests can check the pool's
/// admission bound.
pub struct ScriptedTransfer {
    default_delay: Duration,
    delays: HashMap<ImageId, Duration>,
    failures: HashSet<ImageId>,
    jitter: Option<Duration>,
    target: Option<(Arc<MemoryRegistry>, String)>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    started: Mutex<Vec<ImageId>>,
    completed: Mutex<Vec<ImageId>>,
}

impl ScriptedTransfer {
    pub fn new(default_delay: Duration) -> Self {
        Self {
            default_delay,
            delays: HashMap::new(),
            failures: HashSet::new(),
            jitter: None,
            target: None,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            started: Mutex::new(Vec::new()),
            completed: Mutex::new(Vec::new()),
        }
    }

    /// Override the delay for one image.
    pub fn delay(mut self, image: &str, delay: Duration) -> Self {
        self.delays.insert(ImageId::from(image), delay);
        self
    }

    /// Make one image fail after its delay.
    pub fn fail(mut self, image: &str) -> Self {
        self.failures.insert(ImageId::from(image));
        self
    }

    /// Add a random extra delay up to `max` to every transfer.
    pub fn with_jitter(mut self, max: Duration) -> Self {
        self.jitter = Some(max);
        self
    }

    /// Insert successful transfers into `namespace` of `registry`.
    pub fn deliver_to(mut self, registry: Arc<MemoryRegistry>, namespace: &str) -> Self {
        self.target = Some((registry, namespace.to_string()));
        self
    }

    /// Highest number of transfers observed running at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Images whose transfer started, in start order.
    pub fn started(&self) -> Vec<ImageId> {
        self.started.lock().unwrap().clone()
    }

    /// Images whose transfer finished successfully, in completion order.
    pub fn completed(&self) -> Vec<ImageId> {
        self.completed.lock().unwrap().clone()
    }

    fn delay_for(&self, image: &ImageId) -> Duration {
        let base = self.delays.get(image).copied().unwrap_or(self.default_delay);
        match self.jitter {
            Some(max) if !max.is_zero() => {
                let extra = rand::thread_rng().gen_range(0..=max.as_millis() as u64);
                base + Duration::from_millis(extra)
            }
            _ => base,
        }
    }
}

#[async_trait]
impl ImageTransfer for ScriptedTransfer {
    async fn transfer(&self, image: &ImageId) -> Result<()> {
        self.started.lock().unwrap().push(image.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay_for(image)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failures.contains(image) {
            return Err(RegistryError::Transfer {
                image: image.clone(),
                message: "scripted failure".into(),
            });
        }

        if let Some((registry, namespace)) = &self.target {
            registry.insert(namespace, image.clone());
        }
        self.completed.lock().unwrap().push(image.clone());
        Ok(())
    }
}
