use log::{info, warn};
use sdl2::audio::{AudioQueue, AudioSpecDesired};
use sdl2::controller::GameController;
use sdl2::haptic::Haptic;
use sdl2::joystick::Joystick;
use sdl2::video::{GLContext, GLProfile, SwapInterval, Window};
use sdl2::{EventPump, GameControllerSubsystem, JoystickSubsystem, Sdl, TimerSubsystem};
use sdl2::{HapticSubsystem, VideoSubsystem};

use super::{AudioRequest, InputRequest, Platform, PlatformError};
use crate::display::DisplayMode;

/// SDL2 backend with an OpenGL 3.3 core rendering context.
pub struct Sdl2Platform {
    title: String,
    sdl: Option<Sdl>,
}

pub struct SdlSystem {
    pub timer: TimerSubsystem,
    pub events: EventPump,
}

pub struct SdlWindow {
    pub video: VideoSubsystem,
    pub window: Window,
}

pub struct SdlAudio {
    pub queue: AudioQueue<i16>,
}

/// Devices drop before the subsystems that opened them.
pub struct SdlInput {
    pub controllers: Vec<GameController>,
    pub joysticks: Vec<Joystick>,
    pub haptics: Vec<Haptic>,
    _joystick: JoystickSubsystem,
    _controller: GameControllerSubsystem,
    _haptic: Option<HapticSubsystem>,
}

impl Sdl2Platform {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sdl: None,
        }
    }

    fn sdl(&self, operation: &'static str) -> Result<&Sdl, PlatformError> {
        self.sdl
            .as_ref()
            .ok_or_else(|| PlatformError::new(operation, "SDL is not initialized"))
    }
}

impl Platform for Sdl2Platform {
    type System = SdlSystem;
    type Window = SdlWindow;
    type Context = GLContext;
    type Audio = SdlAudio;
    type Input = SdlInput;

    fn name(&self) -> &'static str {
        "sdl2"
    }

    fn init_system(&mut self) -> Result<Self::System, PlatformError> {
        let sdl = sdl2::init().map_err(|err| PlatformError::new("init SDL", err))?;
        let timer = sdl
            .timer()
            .map_err(|err| PlatformError::new("init timer", err))?;
        let events = sdl
            .event_pump()
            .map_err(|err| PlatformError::new("init events", err))?;
        info!("SDL {} initialized", sdl2::version::version());
        self.sdl = Some(sdl);
        Ok(SdlSystem { timer, events })
    }

    fn quit_system(&mut self, system: Self::System) -> Result<(), PlatformError> {
        drop(system);
        self.sdl = None;
        Ok(())
    }

    fn create_window(&mut self, mode: &DisplayMode) -> Result<Self::Window, PlatformError> {
        let video = self
            .sdl("create window")?
            .video()
            .map_err(|err| PlatformError::new("init video", err))?;

        let samples = mode.samples();
        let gl_attr = video.gl_attr();
        gl_attr.set_context_profile(GLProfile::Core);
        gl_attr.set_context_version(3, 3);
        gl_attr.set_double_buffer(true);
        gl_attr.set_multisample_buffers(u8::from(samples > 0));
        gl_attr.set_multisample_samples(samples);

        let mut builder = video.window(&self.title, mode.width, mode.height);
        builder.opengl().position_centered();
        if mode.fullscreen {
            builder.fullscreen();
        }
        let window = builder
            .build()
            .map_err(|err| PlatformError::new("create window", err.to_string()))?;
        Ok(SdlWindow { video, window })
    }

    fn create_context(
        &mut self,
        window: &Self::Window,
        mode: &DisplayMode,
    ) -> Result<Self::Context, PlatformError> {
        let context = window
            .window
            .gl_create_context()
            .map_err(|err| PlatformError::new("create context", err))?;

        let granted = window.video.gl_attr().multisample_samples();
        if granted < mode.samples() {
            return Err(PlatformError::new(
                "create context",
                format!("requested {} samples, got {granted}", mode.samples()),
            ));
        }

        let interval = if mode.vsync {
            SwapInterval::VSync
        } else {
            SwapInterval::Immediate
        };
        if let Err(err) = window.video.gl_set_swap_interval(interval) {
            warn!("unable to set swap interval: {err}");
        }
        Ok(context)
    }

    fn destroy_context(&mut self, context: Self::Context) -> Result<(), PlatformError> {
        drop(context);
        Ok(())
    }

    fn destroy_window(&mut self, window: Self::Window) -> Result<(), PlatformError> {
        drop(window);
        Ok(())
    }

    fn open_audio(&mut self, request: &AudioRequest) -> Result<Self::Audio, PlatformError> {
        let audio = self
            .sdl("open audio")?
            .audio()
            .map_err(|err| PlatformError::new("init audio", err))?;
        let desired = AudioSpecDesired {
            freq: Some(request.frequency),
            channels: Some(request.channels),
            samples: Some(request.buffer),
        };
        let queue = audio
            .open_queue::<i16, _>(None, &desired)
            .map_err(|err| PlatformError::new("open audio", err))?;
        queue.resume();
        Ok(SdlAudio { queue })
    }

    fn close_audio(&mut self, audio: Self::Audio) -> Result<(), PlatformError> {
        audio.queue.pause();
        audio.queue.clear();
        Ok(())
    }

    fn open_input(&mut self, request: &InputRequest) -> Result<Self::Input, PlatformError> {
        let sdl = self.sdl("open input")?;
        let joystick = sdl
            .joystick()
            .map_err(|err| PlatformError::new("init joystick", err))?;
        let controller = sdl
            .game_controller()
            .map_err(|err| PlatformError::new("init game controller", err))?;
        let haptic = match sdl.haptic() {
            Ok(haptic) => Some(haptic),
            Err(err) => {
                warn!("haptic feedback unavailable: {err}");
                None
            }
        };

        let mut controllers = Vec::new();
        let mut joysticks = Vec::new();
        let mut haptics = Vec::new();
        if request.joysticks {
            let count = joystick
                .num_joysticks()
                .map_err(|err| PlatformError::new("enumerate joysticks", err))?;
            for index in 0..count {
                if controller.is_game_controller(index) {
                    match controller.open(index) {
                        Ok(device) => {
                            info!("opened game controller {}", device.name());
                            controllers.push(device);
                        }
                        Err(err) => warn!("unable to open game controller {index}: {err}"),
                    }
                } else {
                    match joystick.open(index) {
                        Ok(device) => {
                            info!("opened joystick {}", device.name());
                            joysticks.push(device);
                        }
                        Err(err) => warn!("unable to open joystick {index}: {err}"),
                    }
                }
                if let Some(haptic) = haptic.as_ref() {
                    if let Ok(device) = haptic.open_from_joystick_id(index) {
                        haptics.push(device);
                    }
                }
            }
        }

        Ok(SdlInput {
            controllers,
            joysticks,
            haptics,
            _joystick: joystick,
            _controller: controller,
            _haptic: haptic,
        })
    }

    fn close_input(&mut self, input: Self::Input) -> Result<(), PlatformError> {
        drop(input);
        Ok(())
    }

    fn describe_audio(&self, audio: &Self::Audio) -> Option<String> {
        let spec = audio.queue.spec();
        Some(format!(
            "{}Hz, {} channel(s), {} sample buffer",
            spec.freq, spec.channels, spec.samples
        ))
    }

    fn describe_input(&self, input: &Self::Input) -> Option<String> {
        Some(format!(
            "{} controller(s), {} joystick(s), {} haptic device(s)",
            input.controllers.len(),
            input.joysticks.len(),
            input.haptics.len()
        ))
    }
}
