use std::{thread, time};

use anyhow::Result;
use crossbeam::channel::{bounded, Receiver, Sender};

use crate::{
    cmd::Command,
    config::Config,
    logger,
    message::Message,
    workers::{KubeWorker, Render, Tick, UserInput},
};

pub struct App;

impl App {
    pub fn run(cmd: Command, config: Config) -> Result<()> {
        let kube_worker_config = cmd.kube_worker_config(config.cluster_config.clone());

        let page_size = cmd.page_size.unwrap_or(config.preferences.page_size);

        let (tx_input, rx_main): (Sender<Message>, Receiver<Message>) = bounded(128);
        let (tx_main, rx_kube): (Sender<Message>, Receiver<Message>) = bounded(256);
        let tx_kube = tx_input.clone();
        let tx_tick = tx_input.clone();

        let (tx_shutdown, rx_shutdown) = bounded::<Result<()>>(1);

        let user_input = UserInput::new(tx_input, tx_shutdown.clone());

        let kube = KubeWorker::new(tx_kube, rx_kube, tx_shutdown.clone(), kube_worker_config);

        let tick = Tick::new(
            tx_tick,
            time::Duration::from_millis(200),
            tx_shutdown.clone(),
        );

        let render = Render::new(tx_main, rx_main, tx_shutdown.clone(), page_size);

        logger!(info, "app start (page size {})", page_size);

        thread::spawn(|| {
            kube.set_panic_hook();
            kube.start();
        });

        thread::spawn(move || {
            tick.set_panic_hook();
            tick.start();
        });

        thread::spawn(move || {
            user_input.set_panic_hook();
            user_input.start();
        });

        thread::spawn(move || {
            render.set_panic_hook();
            render.start();
        });

        let result = rx_shutdown.recv()?;

        logger!(info, "app end");

        result
    }
}
