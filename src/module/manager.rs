//! Module manager service
//!
//! Owns a [`ModuleLoader`] and drives it from two channels: commands sent by
//! any number of [`ModuleManagerHandle`]s, and the host's lifecycle signals.
//! The loader stays single-writer; handles can be cloned into hooks and
//! callbacks to include further modules from inside an inclusion.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::config::LoaderConfig;
use crate::module::api::events::{HostEvent, HostEventReceiver};
use crate::module::api::host::StaticHost;
use crate::module::loader::ModuleLoader;
use crate::module::registry::ModuleDescriptor;
use crate::module::traits::{
    AssetFetcher, HostEnvironment, IncludeCallback, IncludeOptions, ModuleError,
};

/// Request sent from a handle to the manager
pub enum ManagerCommand {
    Register(ModuleDescriptor),
    Include {
        id: String,
        callback: Option<IncludeCallback>,
        options: IncludeOptions,
    },
}

/// Cloneable sender side of a running [`ModuleManager`]
#[derive(Clone)]
pub struct ModuleManagerHandle {
    tx: mpsc::UnboundedSender<ManagerCommand>,
}

impl ModuleManagerHandle {
    /// Register (or replace) a module descriptor
    pub fn register(&self, descriptor: ModuleDescriptor) -> Result<(), ModuleError> {
        self.send(ManagerCommand::Register(descriptor))
    }

    /// Queue an include; `callback` follows the loader's include contract
    pub fn include(
        &self,
        id: impl Into<String>,
        callback: Option<IncludeCallback>,
        options: IncludeOptions,
    ) -> Result<(), ModuleError> {
        self.send(ManagerCommand::Include {
            id: id.into(),
            callback,
            options,
        })
    }

    /// Include a module and wait until its callback would have run
    ///
    /// Fails with [`ModuleError::IncludeAbandoned`] when the include ends
    /// without running the callback (unknown id, malformed asset URL).
    pub async fn include_and_wait(
        &self,
        id: impl Into<String>,
        options: IncludeOptions,
    ) -> Result<(), ModuleError> {
        let id = id.into();
        let (done_tx, done_rx) = oneshot::channel();
        let callback: IncludeCallback = Box::new(move || {
            let _ = done_tx.send(());
        });

        self.include(id.clone(), Some(callback), options)?;
        done_rx
            .await
            .map_err(|_| ModuleError::IncludeAbandoned(id))
    }

    fn send(&self, command: ManagerCommand) -> Result<(), ModuleError> {
        self.tx
            .send(command)
            .map_err(|_| ModuleError::ManagerStopped)
    }
}

/// Service loop around a module loader
pub struct ModuleManager<F, H> {
    loader: ModuleLoader<F, H>,
    commands: mpsc::UnboundedReceiver<ManagerCommand>,
    host_events: Option<HostEventReceiver>,
}

impl<F, H> ModuleManager<F, H>
where
    F: AssetFetcher + 'static,
    H: HostEnvironment,
{
    /// Wrap `loader`, subscribing to the host's lifecycle signals
    pub fn new(loader: ModuleLoader<F, H>, host_events: HostEventReceiver) -> (Self, ModuleManagerHandle) {
        let (tx, commands) = mpsc::unbounded_channel();
        let manager = Self {
            loader,
            commands,
            host_events: Some(host_events),
        };
        (manager, ModuleManagerHandle { tx })
    }

    /// Process commands and host signals until every handle is dropped
    ///
    /// Commands sent before a host signal are handled before it, so a module
    /// registered ahead of `ContentReady` is seen by the sweep. Signals still
    /// queued when the last handle goes away are handled before returning.
    ///
    /// Returns the loader so its final state can be inspected.
    pub async fn run(mut self) -> ModuleLoader<F, H> {
        info!("Module manager started");

        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => {
                        self.drain_host_events();
                        break;
                    }
                },
                event = Self::next_host_event(&mut self.host_events) => match event {
                    Some(event) => {
                        self.drain_commands();
                        self.handle_host_event(event);
                    }
                    None => {
                        debug!("Host signal channel closed");
                        self.host_events = None;
                    }
                },
            }
        }

        info!("Module manager stopped");
        self.loader
    }

    fn handle_command(&mut self, command: ManagerCommand) {
        match command {
            ManagerCommand::Register(descriptor) => self.loader.register(descriptor),
            ManagerCommand::Include {
                id,
                callback,
                options,
            } => {
                if let Err(e) = self.loader.include(&id, callback, options) {
                    error!("Failed to include module {}: {}", id, e);
                }
            }
        }
    }

    fn handle_host_event(&mut self, event: HostEvent) {
        debug!("Host signal: {:?}", event);
        let outcomes = self.loader.handle_host_event(event);
        debug!("Host signal {:?} produced {} includes", event, outcomes.len());
    }

    /// Handle every command already queued
    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            self.handle_command(command);
        }
    }

    /// Handle every host signal already queued
    fn drain_host_events(&mut self) {
        let mut pending = Vec::new();
        if let Some(events) = self.host_events.as_mut() {
            while let Ok(event) = events.try_recv() {
                pending.push(event);
            }
        }
        for event in pending {
            self.handle_host_event(event);
        }
    }

    /// Next host signal, or pending forever once the channel is gone
    async fn next_host_event(events: &mut Option<HostEventReceiver>) -> Option<HostEvent> {
        match events {
            Some(rx) => rx.recv().await,
            None => std::future::pending().await,
        }
    }

    pub fn loader(&self) -> &ModuleLoader<F, H> {
        &self.loader
    }
}

impl<F> ModuleManager<F, StaticHost>
where
    F: AssetFetcher + 'static,
{
    /// Build a manager from configuration, registering every configured module
    pub fn from_config(
        config: &LoaderConfig,
        fetcher: Arc<F>,
        host_events: HostEventReceiver,
    ) -> anyhow::Result<(Self, ModuleManagerHandle)> {
        config.validate()?;

        let host = StaticHost::from_config(config)?;
        let mut loader = ModuleLoader::new(fetcher, host);
        for manifest in &config.modules {
            loader.register(manifest.to_descriptor());
        }

        info!("Registered {} configured modules", config.modules.len());
        Ok(Self::new(loader, host_events))
    }
}
