//! Application state management.

use anyhow::{Context, Result};
use gfx_hat_stats_hw::{Backlight, Button, Framebuffer, LcdDevice, TouchAction, TouchDevice};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::pages::{self, Page};
use crate::sensors::data::SystemData;
use crate::sensors::{
    Clock, CpuSensor, MemorySensor, MountUsage, NetworkSensor, Sensor, ServiceMonitor,
    TemperatureSensor,
};

/// Samples kept for the rolling graphs; one column per sample.
const HISTORY_LEN: usize = 126;

/// Sensors collection for sampling system data.
struct Sensors {
    cpu: CpuSensor,
    temperature: TemperatureSensor,
    memory: MemorySensor,
    network: NetworkSensor,
    copyparty: ServiceMonitor,
    sd: MountUsage,
    nvme: MountUsage,
    clock: Clock,
    cpu_history: VecDeque<f64>,
    net_history: VecDeque<f64>,
}

impl Sensors {
    fn new(config: &Config) -> Self {
        let network = match &config.network.interface {
            Some(interface) => NetworkSensor::new(interface),
            None => NetworkSensor::auto(),
        };
        Self {
            cpu: CpuSensor::new(),
            temperature: TemperatureSensor::new(),
            memory: MemorySensor::new(),
            network,
            copyparty: ServiceMonitor::new(&config.copyparty.unit),
            sd: MountUsage::new("/"),
            nvme: MountUsage::new(&config.storage.nvme_mount),
            clock: Clock::new(),
            cpu_history: VecDeque::with_capacity(HISTORY_LEN),
            net_history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    fn push_history(history: &mut VecDeque<f64>, value: f64) {
        if history.len() == HISTORY_LEN {
            history.pop_front();
        }
        history.push_back(value);
    }

    fn sample(&mut self, copyparty_port: u16) -> SystemData {
        let cpu_percent = self.cpu.sample();
        let ram_percent = self.memory.sample();
        let net_kbps = self.network.sample();

        Self::push_history(&mut self.cpu_history, cpu_percent);
        Self::push_history(&mut self.net_history, net_kbps);

        SystemData {
            ip: crate::sensors::local_ip(),
            copyparty_active: self.copyparty.is_active(),
            copyparty_port,
            time: self.clock.time(),
            date: self.clock.date(),
            sd: self.sd.usage(),
            nvme: self.nvme.usage(),
            ram_percent,
            ram_used_gb: self.memory.used_gb(),
            ram_total_gb: self.memory.total_gb(),
            cpu_percent,
            cpu_temp: self.temperature.temperature(),
            net_kbps,
            cpu_history: self.cpu_history.iter().copied().collect(),
            net_history: self.net_history.iter().copied().collect(),
        }
    }
}

/// Shared application state.
pub struct AppState {
    config: Config,

    /// Index into `pages`, driven by the touch buttons
    current_page: AtomicUsize,
    pages: Vec<Box<dyn Page>>,

    sensors: Mutex<Sensors>,

    lcd: Mutex<LcdDevice>,
    touch: Mutex<TouchDevice>,
    backlight: Mutex<Backlight>,
    backlight_on: AtomicBool,
}

impl AppState {
    /// Opens the hardware and builds the initial state. The backlight
    /// comes up at the configured color.
    pub fn new(config: Config) -> Result<Self> {
        let lcd = LcdDevice::open_with_contrast(config.contrast).context("open LCD")?;
        let touch = TouchDevice::open(gfx_hat_stats_hw::I2C_BUS).context("open touch controller")?;
        let mut backlight =
            Backlight::open(gfx_hat_stats_hw::I2C_BUS).context("open backlight")?;

        backlight.set_all(config.backlight.r, config.backlight.g, config.backlight.b);
        backlight.show().context("set backlight")?;

        Ok(Self {
            sensors: Mutex::new(Sensors::new(&config)),
            config,
            current_page: AtomicUsize::new(0),
            pages: pages::pages(),
            lcd: Mutex::new(lcd),
            touch: Mutex::new(touch),
            backlight: Mutex::new(backlight),
            backlight_on: AtomicBool::new(true),
        })
    }

    /// Returns the configured refresh interval in milliseconds.
    pub fn refresh_interval_ms(&self) -> u64 {
        self.config.refresh
    }

    /// Samples the sensors and redraws the current page.
    pub fn render_frame(&self) -> Result<()> {
        let data = self
            .sensors
            .lock()
            .unwrap()
            .sample(self.config.copyparty.port);

        let index = self.current_page.load(Ordering::Relaxed) % self.pages.len();
        let page = &self.pages[index];

        let mut fb = Framebuffer::new();
        page.render(&mut fb, &data);
        self.lcd.lock().unwrap().show(&fb)?;
        debug!("rendered page {}", page.name());
        Ok(())
    }

    /// Polls the touch controller and reacts to button presses.
    pub fn poll_touch(&self) -> Result<()> {
        let events = self.touch.lock().unwrap().poll()?;
        for event in events {
            if event.action != TouchAction::Press {
                continue;
            }
            match event.button {
                Button::Minus => {
                    self.turn_page(pages::prev_page)?;
                }
                Button::Plus => {
                    self.turn_page(pages::next_page)?;
                }
                Button::Select => {
                    self.toggle_backlight()?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn turn_page(&self, advance: fn(usize) -> usize) -> Result<()> {
        let index = advance(self.current_page.load(Ordering::Relaxed));
        self.current_page.store(index, Ordering::Relaxed);
        info!("switched to page {}", self.pages[index].name());
        self.render_frame()
    }

    fn toggle_backlight(&self) -> Result<()> {
        let mut backlight = self.backlight.lock().unwrap();
        if self.backlight_on.swap(false, Ordering::Relaxed) {
            backlight.off()?;
            info!("backlight off");
        } else {
            self.backlight_on.store(true, Ordering::Relaxed);
            backlight.set_all(
                self.config.backlight.r,
                self.config.backlight.g,
                self.config.backlight.b,
            );
            backlight.show()?;
            info!("backlight on");
        }
        Ok(())
    }

    /// Blanks the display and switches the backlight off. Best effort;
    /// failures are logged, not propagated, so shutdown always completes.
    pub fn shutdown(&self) {
        if let Err(e) = self.lcd.lock().unwrap().blank() {
            warn!("Failed to blank LCD on shutdown: {}", e);
        }
        if let Err(e) = self.backlight.lock().unwrap().off() {
            warn!("Failed to switch backlight off on shutdown: {}", e);
        }
    }
}
