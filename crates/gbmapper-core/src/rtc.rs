use std::{
    cell::Cell,
    fmt,
    rc::Rc,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::savestate::RtcState;

const SECONDS_PER_DAY: i64 = 86_400;
/// Elapsed spans beyond this many days set the day-carry flag.
const DAY_COUNTER_SPAN: i64 = 0x1FF;

const DH_DAY_BIT8: u8 = 0x01;
const DH_HALT: u8 = 0x40;
const DH_CARRY: u8 = 0x80;

/// Source of wall-clock time in whole seconds.
pub trait Clock: fmt::Debug {
    fn now(&self) -> i64;
}

/// Host wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Default, Clone)]
pub struct ManualClock(Rc<Cell<i64>>);

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self(Rc::new(Cell::new(start)))
    }

    pub fn set(&self, now: i64) {
        self.0.set(now);
    }

    pub fn advance(&self, seconds: i64) {
        self.0.set(self.0.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.0.get()
    }
}

/// RTC register reachable through the 0xA000-0xBFFF window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtcRegister {
    Seconds,
    Minutes,
    Hours,
    DaysLow,
    /// Day bit 8, halt flag (bit 6) and day carry (bit 7).
    DaysHigh,
}

impl RtcRegister {
    fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Seconds),
            1 => Some(Self::Minutes),
            2 => Some(Self::Hours),
            3 => Some(Self::DaysLow),
            4 => Some(Self::DaysHigh),
            _ => None,
        }
    }
}

/// MBC3 real-time clock.
///
/// The running counter is kept as a base time: the wall-clock instant at
/// which the counter read zero. Registers only change when latched, and
/// writes rebase the counter so it continues from the written value.
#[derive(Debug)]
pub struct Rtc {
    clock: Box<dyn Clock>,
    base_time: i64,
    halt_time: i64,
    index: u8,
    data_dh: u8,
    data_dl: u8,
    data_h: u8,
    data_m: u8,
    data_s: u8,
    enabled: bool,
    last_latch_data: bool,
}

impl Rtc {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            clock,
            base_time: now,
            halt_time: now,
            index: 0,
            data_dh: 0,
            data_dl: 0,
            data_h: 0,
            data_m: 0,
            data_s: 0,
            enabled: false,
            last_latch_data: false,
        }
    }

    /// Reset the counter to zero as of now and disable register access.
    pub fn reset(&mut self) {
        let now = self.clock.now();
        self.base_time = now;
        self.halt_time = now;
        self.index = 0;
        self.data_dh = 0;
        self.data_dl = 0;
        self.data_h = 0;
        self.data_m = 0;
        self.data_s = 0;
        self.enabled = false;
        self.last_latch_data = false;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Register currently visible in the RAM window, if any.
    pub fn active(&self) -> Option<RtcRegister> {
        if !self.enabled {
            return None;
        }
        RtcRegister::from_index(self.index)
    }

    pub fn get_active(&self) -> bool {
        self.active().is_some()
    }

    /// Select a register from a raw 0x4000-0x5FFF write. Selectors
    /// 0x08-0x0C pick a register; anything else deselects the clock.
    pub fn swap_active(&mut self, selector: u8) {
        self.index = (selector & 0x0F).wrapping_sub(8);
    }

    /// Latch the running counter into the registers on a 0 -> 1 write.
    pub fn latch(&mut self, data: u8) {
        if !self.last_latch_data && data == 1 {
            self.do_latch();
        }
        self.last_latch_data = data != 0;
    }

    pub fn register(&self, reg: RtcRegister) -> u8 {
        match reg {
            RtcRegister::Seconds => self.data_s,
            RtcRegister::Minutes => self.data_m,
            RtcRegister::Hours => self.data_h,
            RtcRegister::DaysLow => self.data_dl,
            RtcRegister::DaysHigh => self.data_dh,
        }
    }

    pub fn read(&self) -> u8 {
        self.active().map(|reg| self.register(reg)).unwrap_or(0xFF)
    }

    pub fn write(&mut self, data: u8) {
        let Some(reg) = self.active() else {
            return;
        };
        match reg {
            RtcRegister::Seconds => {
                let value = data & 0x3F;
                self.set_seconds(value);
                self.data_s = value;
            }
            RtcRegister::Minutes => {
                let value = data & 0x3F;
                self.set_minutes(value);
                self.data_m = value;
            }
            RtcRegister::Hours => {
                let value = data & 0x1F;
                self.set_hours(value);
                self.data_h = value;
            }
            RtcRegister::DaysLow => {
                self.set_days_low(data);
                self.data_dl = data;
            }
            RtcRegister::DaysHigh => {
                let value = data & (DH_DAY_BIT8 | DH_HALT | DH_CARRY);
                self.set_days_high(value);
                self.data_dh = value;
            }
        }
    }

    pub fn base_time(&self) -> i64 {
        self.base_time
    }

    pub fn set_base_time(&mut self, base_time: i64) {
        self.base_time = base_time;
    }

    pub fn capture(&self, state: &mut RtcState) {
        state.base_time = self.base_time;
        state.halt_time = self.halt_time;
        state.index = self.index;
        state.data_dh = self.data_dh;
        state.data_dl = self.data_dl;
        state.data_h = self.data_h;
        state.data_m = self.data_m;
        state.data_s = self.data_s;
        state.last_latch_data = self.last_latch_data;
    }

    pub fn restore(&mut self, state: &RtcState, enabled: bool) {
        self.base_time = state.base_time;
        self.halt_time = state.halt_time;
        self.index = state.index;
        self.data_dh = state.data_dh;
        self.data_dl = state.data_dl;
        self.data_h = state.data_h;
        self.data_m = state.data_m;
        self.data_s = state.data_s;
        self.last_latch_data = state.last_latch_data;
        self.enabled = enabled;
    }

    fn halted(&self) -> bool {
        self.data_dh & DH_HALT != 0
    }

    /// Wall-clock time the counter is measured against; frozen while halted.
    fn reference_time(&self) -> i64 {
        if self.halted() {
            self.halt_time
        } else {
            self.clock.now()
        }
    }

    fn elapsed(&self) -> i64 {
        self.reference_time().saturating_sub(self.base_time).max(0)
    }

    fn do_latch(&mut self) {
        let span = DAY_COUNTER_SPAN * SECONDS_PER_DAY;
        let mut elapsed = self.elapsed();
        if elapsed > span {
            // Fold whole day-counter periods into the base; the remainder
            // stays in (0, span].
            let wraps = (elapsed - 1) / span;
            self.base_time = self.base_time.saturating_add(wraps * span);
            elapsed -= wraps * span;
            self.data_dh |= DH_CARRY;
        }

        let days = elapsed / SECONDS_PER_DAY;
        self.data_dl = (days & 0xFF) as u8;
        self.data_dh = (self.data_dh & !DH_DAY_BIT8) | ((days >> 8) & 0x01) as u8;

        let rem = elapsed % SECONDS_PER_DAY;
        self.data_h = (rem / 3600) as u8;
        self.data_m = (rem % 3600 / 60) as u8;
        self.data_s = (rem % 60) as u8;
    }

    /// Swap one field of the running counter: drop `old` seconds' worth and
    /// add `new` in its place.
    fn rebase(&mut self, old: i64, new: i64) {
        self.base_time = self.base_time.saturating_add(old).saturating_sub(new);
    }

    fn set_seconds(&mut self, seconds: u8) {
        self.rebase(self.elapsed() % 60, i64::from(seconds));
    }

    fn set_minutes(&mut self, minutes: u8) {
        let old = self.elapsed() / 60 % 60;
        self.rebase(old * 60, i64::from(minutes) * 60);
    }

    fn set_hours(&mut self, hours: u8) {
        let old = self.elapsed() / 3600 % 24;
        self.rebase(old * 3600, i64::from(hours) * 3600);
    }

    fn set_days_low(&mut self, days: u8) {
        let old = self.elapsed() / SECONDS_PER_DAY & 0xFF;
        self.rebase(old * SECONDS_PER_DAY, i64::from(days) * SECONDS_PER_DAY);
    }

    fn set_days_high(&mut self, new_dh: u8) {
        let old_high = self.elapsed() / SECONDS_PER_DAY & 0x100;
        self.rebase(
            old_high * SECONDS_PER_DAY,
            (i64::from(new_dh & DH_DAY_BIT8) << 8) * SECONDS_PER_DAY,
        );

        if (self.data_dh ^ new_dh) & DH_HALT != 0 {
            let now = self.clock.now();
            if new_dh & DH_HALT != 0 {
                self.halt_time = now;
            } else {
                self.base_time = self
                    .base_time
                    .saturating_add(now.saturating_sub(self.halt_time));
            }
        }
    }
}
