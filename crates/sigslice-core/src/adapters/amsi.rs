//! AMSI 适配器（系统 API 型，仅 Windows）
//!
//! 直接对 amsi.dll 做 FFI：上下文与会话在构造时获取，由守卫
//! 结构在析构时恰好释放一次（重复释放是幂等的）。构造时用
//! AMSI 测试样本确认实时防护开启，未开启即永久失败。

use std::ffi::c_void;
use std::ptr;

use tracing::error;

use crate::detector::Detector;
use crate::error::SetupError;
use crate::outcome::{ScanOutcome, ScanStatus};

const AMSI_RESULT_DETECTED: i32 = 32768;

const APP_NAME: &str =
    r"PowerShell_C:\Windows\System32\WindowsPowerShell\v1.0\powershell.exe_5.1.22621.2506";
const CONTENT_NAME: &str = "sample.ps1";

#[link(name = "amsi")]
extern "system" {
    fn AmsiInitialize(app_name: *const u16, amsi_context: *mut *mut c_void) -> i32;
    fn AmsiOpenSession(amsi_context: *mut c_void, session: *mut *mut c_void) -> i32;
    fn AmsiScanBuffer(
        amsi_context: *mut c_void,
        buffer: *const u8,
        length: u32,
        content_name: *const u16,
        session: *mut c_void,
        result: *mut i32,
    ) -> i32;
    fn AmsiCloseSession(amsi_context: *mut c_void, session: *mut c_void);
    fn AmsiUninitialize(amsi_context: *mut c_void);
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// AMSI 上下文 + 会话的释放守卫
///
/// 释放恰好一次：`release` 可重复调用，Drop 兜底。
struct AmsiSession {
    context: *mut c_void,
    session: *mut c_void,
    released: bool,
}

impl AmsiSession {
    fn open(app_name: &str) -> Result<Self, SetupError> {
        let app_name = to_wide(app_name);
        let mut context: *mut c_void = ptr::null_mut();
        let ret = unsafe { AmsiInitialize(app_name.as_ptr(), &mut context) };
        if ret != 0 {
            return Err(SetupError::DetectorUnavailable(format!(
                "AmsiInitialize failed with code {ret}"
            )));
        }

        let mut session: *mut c_void = ptr::null_mut();
        let ret = unsafe { AmsiOpenSession(context, &mut session) };
        if ret != 0 {
            unsafe { AmsiUninitialize(context) };
            return Err(SetupError::DetectorUnavailable(format!(
                "AmsiOpenSession failed with code {ret}"
            )));
        }

        Ok(Self { context, session, released: false })
    }

    /// 在给定会话句柄上扫一段缓冲；返回 AMSI_RESULT 值
    fn scan_buffer(&self, data: &[u8], session: *mut c_void) -> Result<i32, ()> {
        let content_name = to_wide(CONTENT_NAME);
        let mut result: i32 = 0;
        let ret = unsafe {
            AmsiScanBuffer(
                self.context,
                data.as_ptr(),
                data.len() as u32,
                content_name.as_ptr(),
                session,
                &mut result,
            )
        };
        if ret != 0 {
            error!(code = ret, "AmsiScanBuffer failed");
            return Err(());
        }
        Ok(result)
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if !self.context.is_null() {
            if !self.session.is_null() {
                unsafe { AmsiCloseSession(self.context, self.session) };
            }
            unsafe { AmsiUninitialize(self.context) };
        }
        self.context = ptr::null_mut();
        self.session = ptr::null_mut();
    }
}

impl Drop for AmsiSession {
    fn drop(&mut self) {
        self.release();
    }
}

pub struct AmsiDetector {
    session: AmsiSession,
}

impl AmsiDetector {
    pub fn new() -> Result<Self, SetupError> {
        let session = AmsiSession::open(APP_NAME)?;
        let detector = Self { session };
        if !detector.real_time_protection_enabled() {
            return Err(SetupError::CapabilityMissing(
                "AMSI requires real-time protection to be enabled".to_string(),
            ));
        }
        Ok(detector)
    }

    /// 用固定的 AMSI 测试样本确认实时防护在工作
    fn real_time_protection_enabled(&self) -> bool {
        let amsi_uid = "7e72c3ce-861b-4339-8740-0ac1484c1386";
        let sample = format!("Invoke-Expression 'AMSI Test Sample: {amsi_uid}'");
        matches!(
            self.session.scan_buffer(sample.as_bytes(), ptr::null_mut()),
            Ok(AMSI_RESULT_DETECTED)
        )
    }
}

impl Detector for AmsiDetector {
    fn engine_name(&self) -> &str {
        "amsi"
    }

    fn scan(&mut self, data: &[u8]) -> ScanOutcome {
        // AMSI 直接扫内存缓冲，无需临时落盘；签名名不可得
        match self.session.scan_buffer(data, self.session.session) {
            Ok(AMSI_RESULT_DETECTED) => ScanOutcome::threat(None),
            Ok(_) => ScanOutcome::status(ScanStatus::NoThreat),
            Err(()) => ScanOutcome::status(ScanStatus::Error),
        }
    }
}
