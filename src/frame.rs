use std::collections::VecDeque;

/// Color channels in a raw frame and in the stacked observation.
pub const FRAME_CHANNELS: usize = 3;

/// Row-major interleaved RGB image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    height: usize,
    width: usize,
    data: Vec<u8>,
}

impl Frame {
    /// `data` must hold `height * width * 3` bytes.
    pub fn new(height: usize, width: usize, data: Vec<u8>) -> Option<Self> {
        (data.len() == height * width * FRAME_CHANNELS).then_some(Self {
            height,
            width,
            data,
        })
    }

    pub fn filled(height: usize, width: usize, value: u8) -> Self {
        Self {
            height,
            width,
            data: vec![value; height * width * FRAME_CHANNELS],
        }
    }

    /// Drops the alpha byte of an RGBA buffer.
    pub fn from_rgba(height: usize, width: usize, rgba: &[u8]) -> Option<Self> {
        if rgba.len() != height * width * 4 {
            return None;
        }
        let data = rgba
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        Some(Self {
            height,
            width,
            data,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, FRAME_CHANNELS)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, y: usize, x: usize, c: usize) -> u8 {
        self.data[(y * self.width + x) * FRAME_CHANNELS + c]
    }

    /// Keeps every second row and every second column.
    pub fn downsample(&self) -> Frame {
        let height = self.height.div_ceil(2);
        let width = self.width.div_ceil(2);
        let mut data = Vec::with_capacity(height * width * FRAME_CHANNELS);
        for y in (0..self.height).step_by(2) {
            let row = &self.data[y * self.width * FRAME_CHANNELS..(y + 1) * self.width * FRAME_CHANNELS];
            for px in row.chunks_exact(FRAME_CHANNELS).step_by(2) {
                data.extend_from_slice(px);
            }
        }
        Frame {
            height,
            width,
            data,
        }
    }

    /// Packs `0x00RRGGBB` pixels for a window buffer.
    pub fn to_u32(&self, out: &mut [u32]) {
        for (dst, src) in out.iter_mut().zip(self.data.chunks_exact(FRAME_CHANNELS)) {
            *dst = ((src[0] as u32) << 16) | ((src[1] as u32) << 8) | (src[2] as u32);
        }
    }
}

// =============================================================================
// Frame Stack
// =============================================================================

/// Ring of the most recent downsampled frames.
///
/// The observation takes the newest frame of each of three equal groups and
/// keeps one color channel from each, so a single RGB-shaped image carries
/// motion across the window.
#[derive(Debug, Clone)]
pub struct FrameStack {
    capacity: usize,
    frames: VecDeque<Frame>,
}

impl FrameStack {
    /// `capacity` must be a positive multiple of three.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0 && capacity % FRAME_CHANNELS == 0);
        Self {
            capacity,
            frames: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() == self.capacity
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Replaces every slot with `frame`.
    pub fn fill(&mut self, frame: Frame) {
        self.frames.clear();
        for _ in 1..self.capacity {
            self.frames.push_back(frame.clone());
        }
        self.frames.push_back(frame);
    }

    /// Appends `frame`, evicting the oldest when full.
    pub fn push(&mut self, frame: Frame) {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    /// Slot indices feeding channels 0, 1 and 2 (2, 5, 8 for nine slots).
    pub fn selected_slots(&self) -> [usize; FRAME_CHANNELS] {
        let group = self.capacity / FRAME_CHANNELS;
        std::array::from_fn(|i| i * group + group - 1)
    }

    /// Stacked observation, or `None` until the ring is full.
    pub fn observation(&self) -> Option<Frame> {
        if !self.is_full() {
            return None;
        }
        let slots = self.selected_slots();
        let first = &self.frames[slots[0]];
        let (height, width) = (first.height, first.width);
        let mut data = vec![0u8; height * width * FRAME_CHANNELS];
        for (c, &slot) in slots.iter().enumerate() {
            let src = &self.frames[slot];
            for (dst, px) in data
                .chunks_exact_mut(FRAME_CHANNELS)
                .zip(src.data.chunks_exact(FRAME_CHANNELS))
            {
                dst[c] = px[c];
            }
        }
        Some(Frame {
            height,
            width,
            data,
        })
    }
}
