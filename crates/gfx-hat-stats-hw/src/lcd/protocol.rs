//! ST7567 command stream builders.
//!
//! Pure functions that assemble the command bytes sent over SPI with the
//! D/C line held low. Keeping them free of I/O makes them testable.

/// LCD bias select, 1/7 bias.
pub const CMD_BIAS_1_7: u8 = 0xA3;
/// Normal segment (column) scan direction.
pub const CMD_SEG_DIR_NORMAL: u8 = 0xA0;
/// Reversed common (row) scan direction.
pub const CMD_COM_REVERSE: u8 = 0xC8;
/// Normal (non-inverted) display mode.
pub const CMD_DISPLAY_NORMAL: u8 = 0xA6;
/// Display start line, line 0.
pub const CMD_START_LINE: u8 = 0x40;
/// Power control: booster, regulator and follower all on.
pub const CMD_POWER_CONTROL: u8 = 0x2F;
/// Regulation ratio base command (low three bits select the ratio).
pub const CMD_REG_RATIO: u8 = 0x20;
/// Display on.
pub const CMD_DISPLAY_ON: u8 = 0xAF;
/// Two-byte contrast command prefix (electronic volume).
pub const CMD_SET_CONTRAST: u8 = 0x81;
/// Page address base command (low four bits select the page).
pub const CMD_PAGE_START: u8 = 0xB0;
/// Column address low nibble base command.
pub const CMD_COL_LOW: u8 = 0x00;
/// Column address high nibble base command.
pub const CMD_COL_HIGH: u8 = 0x10;

/// Maximum electronic volume (contrast) value.
pub const CONTRAST_MAX: u8 = 0x3F;

/// Builds the power-up initialization sequence.
pub fn init_sequence(contrast: u8) -> [u8; 10] {
    [
        CMD_BIAS_1_7,
        CMD_SEG_DIR_NORMAL,
        CMD_COM_REVERSE,
        CMD_DISPLAY_NORMAL,
        CMD_START_LINE,
        CMD_POWER_CONTROL,
        CMD_REG_RATIO | 0x03,
        CMD_DISPLAY_ON,
        CMD_SET_CONTRAST,
        contrast.min(CONTRAST_MAX),
    ]
}

/// Builds the two-byte contrast update command.
pub fn contrast_command(contrast: u8) -> [u8; 2] {
    [CMD_SET_CONTRAST, contrast.min(CONTRAST_MAX)]
}

/// Builds the addressing commands that position the write cursor at the
/// start of a display page.
pub fn page_address(page: u8) -> [u8; 3] {
    [CMD_PAGE_START | (page & 0x0F), CMD_COL_LOW, CMD_COL_HIGH]
}
