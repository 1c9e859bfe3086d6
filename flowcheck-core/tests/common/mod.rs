#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use flowcheck_core::codec::CodecResult;
use flowcheck_core::config::CodecParams;
use flowcheck_core::{
    Binding, CodecContext, CodecError, FileList, NativeRuntime, Result, Runtime, Variant,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Open(Variant, String),
    Release(Variant),
}

/// How the reference decompressor misbehaves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Fault {
    None,
    FlipFirstByte,
    Refuse,
}

/// Native engines plus a log of every context opened and released.
pub struct Recording {
    inner: NativeRuntime,
    fault: Fault,
    pub events: Arc<Mutex<Vec<Event>>>,
    live: Arc<AtomicUsize>,
    pub max_live: Arc<AtomicUsize>,
}

impl Recording {
    pub fn new() -> Self {
        Self::with_fault(Fault::None)
    }

    pub fn with_fault(fault: Fault) -> Self {
        Self {
            inner: NativeRuntime::new(2),
            fault,
            events: Arc::new(Mutex::new(Vec::new())),
            live: Arc::new(AtomicUsize::new(0)),
            max_live: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn opened(&self, variant: Variant) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Open(v, _) if *v == variant))
            .count()
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl Runtime for Recording {
    fn open(&self, variant: Variant, binding: &Binding) -> Result<Box<dyn CodecContext>> {
        let inner = self.inner.open(variant, binding)?;
        self.events
            .lock()
            .unwrap()
            .push(Event::Open(variant, binding.to_string()));
        let now = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live.fetch_max(now, Ordering::SeqCst);
        Ok(Box::new(RecordingContext {
            inner,
            fault: if variant == Variant::Reference {
                self.fault
            } else {
                Fault::None
            },
            events: Arc::clone(&self.events),
            live: Arc::clone(&self.live),
        }))
    }
}

struct RecordingContext {
    inner: Box<dyn CodecContext>,
    fault: Fault,
    events: Arc<Mutex<Vec<Event>>>,
    live: Arc<AtomicUsize>,
}

impl CodecContext for RecordingContext {
    fn variant(&self) -> Variant {
        self.inner.variant()
    }

    fn binding(&self) -> Option<&Binding> {
        self.inner.binding()
    }

    fn compress(&self, input: &[u8], params: &CodecParams) -> CodecResult<Vec<u8>> {
        self.inner.compress(input, params)
    }

    fn decompress(&self, input: &[u8]) -> CodecResult<Vec<u8>> {
        match self.fault {
            Fault::None => self.inner.decompress(input),
            Fault::FlipFirstByte => {
                let mut out = self.inner.decompress(input)?;
                if let Some(b) = out.first_mut() {
                    *b ^= 0xff;
                }
                Ok(out)
            }
            Fault::Refuse => Err(CodecError::Corrupt("decoder refused the stream".into())),
        }
    }

    fn release(self: Box<Self>) -> Result<()> {
        let variant = self.inner.variant();
        self.inner.release()?;
        self.events.lock().unwrap().push(Event::Release(variant));
        self.live.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Compressible but not trivial content.
pub fn corpus(len: usize, seed: u8) -> Vec<u8> {
    let words = ["alpha ", "beta ", "gamma ", "delta ", "epsilon\n", "zeta "];
    let mut out = Vec::with_capacity(len + 8);
    let mut i = seed as usize;
    while out.len() < len {
        out.extend_from_slice(words[i % words.len()].as_bytes());
        i = i.wrapping_mul(31).wrapping_add(7);
    }
    out.truncate(len);
    out
}

pub fn write_inputs(dir: &Path, specs: &[(&str, usize)]) -> (PathBuf, FileList) {
    let mut paths = Vec::new();
    for (i, (name, len)) in specs.iter().enumerate() {
        let p = dir.join(name);
        std::fs::write(&p, corpus(*len, i as u8)).unwrap();
        paths.push(p);
    }
    let manifest = dir.join("manifest.txt");
    let text: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    std::fs::write(&manifest, text.join("\n")).unwrap();
    (manifest, FileList::from_paths(paths))
}

/// Regular files in `dir`, sorted by name.
pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
