//! Module manager service tests

mod common;

use common::*;
use moff_amd::module::{
    host_event_channel, FileSet, HostEvent, IncludeCallback, IncludeOptions, ModuleDescriptor, ModuleError,
    ModuleLoader, ModuleManager,
};
use moff_amd::LoaderConfig;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

#[tokio::test]
async fn test_register_and_include_through_handle() {
    let (log, fetcher, loader) = new_loader();
    let (_host_tx, host_rx) = host_event_channel();
    let (manager, handle) = ModuleManager::new(loader, host_rx);
    let service = tokio::spawn(manager.run());

    handle
        .register(
            ModuleDescriptor::new("player")
                .with_files(FileSet::scripts(["/player.js"]))
                .after_include(log.hook("after")),
        )
        .unwrap();
    handle
        .include_and_wait("player", IncludeOptions::default())
        .await
        .unwrap();

    assert_eq!(fetcher.fetched_urls(), vec!["/player.js"]);
    assert_eq!(log.entries().last().map(String::as_str), Some("after"));

    drop(handle);
    let loader = service.await.unwrap();
    assert!(loader.is_loaded("player"));
}

#[tokio::test]
async fn test_wait_on_unknown_module_is_abandoned() {
    let (_log, _fetcher, loader) = new_loader();
    let (_host_tx, host_rx) = host_event_channel();
    let (manager, handle) = ModuleManager::new(loader, host_rx);
    tokio::spawn(manager.run());

    let err = handle
        .include_and_wait("ghost", IncludeOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ModuleError::IncludeAbandoned(id) if id == "ghost"));
}

#[tokio::test]
async fn test_host_signals_release_deferred_includes() {
    let (_log, fetcher, loader) = new_loader();
    let (host_tx, host_rx) = host_event_channel();
    let (manager, handle) = ModuleManager::new(loader, host_rx);
    tokio::spawn(manager.run());

    handle
        .register(
            ModuleDescriptor::new("analytics")
                .with_files(FileSet::scripts(["/analytics.js"]))
                .load_on_host_ready(true),
        )
        .unwrap();

    let waiter = {
        let handle = handle.clone();
        tokio::spawn(async move {
            handle
                .include_and_wait("analytics", IncludeOptions::default())
                .await
        })
    };

    settle().await;
    assert_eq!(fetcher.call_count(), 0);

    host_tx.send(HostEvent::Loaded).unwrap();
    waiter.await.unwrap().unwrap();
    assert_eq!(fetcher.fetched_urls(), vec!["/analytics.js"]);
}

#[tokio::test]
async fn test_hooks_can_include_through_a_cloned_handle() {
    let (_log, fetcher, loader) = new_loader();
    let (_host_tx, host_rx) = host_event_channel();
    let (manager, handle) = ModuleManager::new(loader, host_rx);
    tokio::spawn(manager.run());

    handle
        .register(ModuleDescriptor::new("widget").with_files(FileSet::scripts(["/widget.js"])))
        .unwrap();

    let (widget_tx, widget_rx) = oneshot::channel::<()>();
    let widget_tx = Mutex::new(Some(widget_tx));
    let nested = handle.clone();
    handle
        .register(
            ModuleDescriptor::new("page")
                .with_files(FileSet::scripts(["/page.js"]))
                .after_include(move || {
                    let Some(tx) = widget_tx.lock().unwrap().take() else {
                        return;
                    };
                    let done: IncludeCallback = Box::new(move || {
                        let _ = tx.send(());
                    });
                    let _ = nested.include("widget", Some(done), IncludeOptions::default());
                }),
        )
        .unwrap();

    handle
        .include_and_wait("page", IncludeOptions::default())
        .await
        .unwrap();
    widget_rx.await.unwrap();

    assert_eq!(fetcher.fetched_urls(), vec!["/page.js", "/widget.js"]);
}

#[tokio::test]
async fn test_from_config_registers_manifests_and_sweeps() {
    let config: LoaderConfig = toml::from_str(
        r#"
base_url = "http://h/"
screen_context = "sm"

[[modules]]
id = "drawer"
load_on_screen = ["sm"]
files = { scripts = ["/drawer.js"], styles = ["/drawer.css"] }

[[modules]]
id = "desktop-only"
load_on_screen = ["lg"]
files = { scripts = ["/desktop.js"] }
"#,
    )
    .unwrap();

    let log = EventLog::default();
    let fetcher = Arc::new(RecordingFetcher::new(log.clone()));
    let (host_tx, host_rx) = host_event_channel();
    let (manager, handle) = ModuleManager::from_config(&config, Arc::clone(&fetcher), host_rx).unwrap();
    assert_eq!(manager.loader().module_ids(), &["drawer", "desktop-only"]);
    let service = tokio::spawn(manager.run());

    host_tx.send(HostEvent::ContentReady).unwrap();
    handle
        .include_and_wait("drawer", IncludeOptions::default())
        .await
        .unwrap();

    drop(handle);
    let loader = service.await.unwrap();
    assert!(loader.is_loaded("drawer"));
    assert!(!loader.is_loaded("desktop-only"));
    // Sweep found drawer already loaded
    assert_eq!(fetcher.fetched_urls(), vec!["/drawer.js", "/drawer.css"]);
}

#[tokio::test]
async fn test_stopped_manager_rejects_commands() {
    let (_log, _fetcher, loader) = new_loader();
    let (_host_tx, host_rx) = host_event_channel();
    let (manager, handle) = ModuleManager::new(loader, host_rx);
    drop(manager);

    let err = handle.register(ModuleDescriptor::new("late")).unwrap_err();
    assert!(matches!(err, ModuleError::ManagerStopped));
}

#[tokio::test]
async fn test_registration_before_content_ready_is_swept() {
    for _ in 0..32 {
        let log = EventLog::default();
        let fetcher = Arc::new(RecordingFetcher::new(log.clone()));
        let loader = ModuleLoader::new(Arc::clone(&fetcher), test_host().with_screen_context("md"));
        let (host_tx, host_rx) = host_event_channel();
        let (manager, handle) = ModuleManager::new(loader, host_rx);

        handle
            .register(
                ModuleDescriptor::new("sidebar")
                    .with_files(FileSet::scripts(["/sidebar.js"]))
                    .load_on_screen(["md"]),
            )
            .unwrap();
        host_tx.send(HostEvent::ContentReady).unwrap();
        drop(handle);

        // Queued signals are still handled after the last handle is gone
        let loader = manager.run().await;
        assert!(loader.is_loaded("sidebar"));
    }
}

#[tokio::test]
async fn test_failed_deferred_include_releases_its_waiter() {
    let (_log, fetcher, loader) = new_loader();
    let (host_tx, host_rx) = host_event_channel();
    let (manager, handle) = ModuleManager::new(loader, host_rx);
    tokio::spawn(manager.run());

    handle
        .register(
            ModuleDescriptor::new("broken")
                .with_files(FileSet::scripts(["http://[::1"]))
                .load_on_host_ready(true),
        )
        .unwrap();
    handle
        .register(
            ModuleDescriptor::new("healthy")
                .with_files(FileSet::scripts(["/healthy.js"]))
                .load_on_host_ready(true),
        )
        .unwrap();

    let wait_for = |id: &'static str| {
        let handle = handle.clone();
        tokio::spawn(async move { handle.include_and_wait(id, IncludeOptions::default()).await })
    };
    let broken = wait_for("broken");
    let healthy = wait_for("healthy");

    settle().await;
    host_tx.send(HostEvent::Loaded).unwrap();

    let err = broken.await.unwrap().unwrap_err();
    assert!(matches!(err, ModuleError::IncludeAbandoned(id) if id == "broken"));
    healthy.await.unwrap().unwrap();
    assert_eq!(fetcher.fetched_urls(), vec!["/healthy.js"]);
}
