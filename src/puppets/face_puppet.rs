use super::{AnimationMixer, PuppetError};
use crate::{
    animation::AnimationClip,
    model::{BlendshapeBatch, MorphTargetTable, PlaybackOptions},
    receivers::Receiver,
    timeline::TimelineBuilder,
    Logger,
};

const BLINK_CLIP: &str = "blink";
const TALK_CLIP: &str = "audioclip";

/// Owns playback state for one face model.
///
/// Alternates between the model's baked default clip and a custom clip. The custom
/// clip starts as a random blink and is replaced by each talk response.
#[derive(Debug)]
pub struct FacePuppet<X: AnimationMixer> {
    logger: Logger,

    table: MorphTargetTable,
    options: PlaybackOptions,
    mixer: X,

    /// Baked animation shipped with the model, if any.
    default_clip: Option<AnimationClip>,
    custom_clip: AnimationClip,
    /// Whether the last toggle played the custom clip.
    playing_custom: bool,
}

impl<X: AnimationMixer> FacePuppet<X> {
    pub fn new(table: MorphTargetTable, options: PlaybackOptions, mixer: X) -> Self {
        let custom_clip = AnimationClip::random(
            BLINK_CLIP,
            options.track_name.as_str(),
            table.len(),
            options.blink_frames,
            options.blink_clip_end,
            &mut rand::thread_rng(),
        );

        Self {
            logger: Logger::create("FacePuppet"),

            table,
            options,
            mixer,

            default_clip: None,
            custom_clip,
            playing_custom: false,
        }
    }

    pub fn with_default_clip(mut self, clip: AnimationClip) -> Self {
        self.set_default_clip(clip);
        self
    }

    pub fn set_default_clip(&mut self, clip: AnimationClip) {
        self.default_clip = Some(clip);
    }

    /// Play the default clip if the custom clip was played last, otherwise the custom clip.
    ///
    /// Nothing changes if the default clip is due but missing.
    pub fn toggle(&mut self) -> Result<&AnimationClip, PuppetError> {
        let clip = if self.playing_custom {
            self.default_clip
                .as_ref()
                .ok_or(PuppetError::NoDefaultClip)?
        } else {
            &self.custom_clip
        };

        self.logger.debug(format!("Toggling to {}", clip.name));
        self.mixer.play_once(clip);
        self.playing_custom = !self.playing_custom;

        Ok(clip)
    }

    /// Play any clip once without changing the toggle state.
    pub fn play_clip(&mut self, clip: &AnimationClip) {
        self.logger.debug(format!("Playing {}", clip.name));
        self.mixer.play_once(clip);
    }

    /// Build the talk clip for `batch` without playing it.
    pub fn clip_from_batch(&self, batch: &BlendshapeBatch) -> AnimationClip {
        let builder =
            TimelineBuilder::new(&self.table).neutral_weight(self.options.neutral_weight);

        let unknown = builder.unknown_keys(batch);
        if !unknown.is_empty() {
            self.logger.debug(format!(
                "Dropping {} unknown blend shapes: {}",
                unknown.len(),
                unknown.into_iter().collect::<Vec<_>>().join(", ")
            ));
        }

        let timeline = builder.build(batch);

        AnimationClip::from_timeline(
            TALK_CLIP,
            self.options.track_name.as_str(),
            &timeline,
            0.0,
            self.options.talk_clip_end,
            self.options.layout,
        )
    }

    /// Fetch blend shapes for `text`, make them the custom clip and play it.
    pub fn submit_text<R: Receiver + ?Sized>(
        &mut self,
        receiver: &R,
        text: &str,
    ) -> Result<&AnimationClip, PuppetError> {
        let batch = receiver.submit_text(text)?;

        self.custom_clip = self.clip_from_batch(&batch);
        self.logger.info(format!(
            "Playing {} built from {} frames",
            self.custom_clip.name,
            batch.len()
        ));
        self.mixer.play_once(&self.custom_clip);

        Ok(&self.custom_clip)
    }

    pub fn update(&mut self, delta: f32) {
        self.mixer.update(delta);
    }

    pub fn mixer(&self) -> &X {
        &self.mixer
    }

    pub fn mixer_mut(&mut self) -> &mut X {
        &mut self.mixer
    }

    pub fn table(&self) -> &MorphTargetTable {
        &self.table
    }

    pub fn options(&self) -> &PlaybackOptions {
        &self.options
    }

    pub fn custom_clip(&self) -> &AnimationClip {
        &self.custom_clip
    }

    pub fn default_clip(&self) -> Option<&AnimationClip> {
        self.default_clip.as_ref()
    }

    pub fn is_playing_custom(&self) -> bool {
        self.playing_custom
    }
}
