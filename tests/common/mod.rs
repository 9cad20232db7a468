#![allow(dead_code)]

use rbysave::{
    save::{checksum, save_schema, CHECKSUM_OFFSET, CHECKSUM_RANGE, SAVE_SIZE},
    Charset,
};

pub const PIKACHU: u8 = 0x54;
pub const BULBASAUR: u8 = 0x99;
pub const SQUIRTLE: u8 = 0xb1;

const NAME_WIDTH: usize = 11;

fn offset(field: &str) -> usize {
    save_schema().offset_of(field).unwrap()
}

fn creature(species: u8, level: u8, width: usize) -> Vec<u8> {
    let mut entry = vec![0u8; width];
    entry[0] = species;
    entry[1..3].copy_from_slice(&20u16.to_be_bytes());
    entry[3] = level;
    entry[5] = 0x16;
    entry[6] = 0x16;
    entry[7] = 45;
    entry[8] = 33;
    entry[9] = 45;
    entry[12..14].copy_from_slice(&4242u16.to_be_bytes());
    entry[14..17].copy_from_slice(&[0x00, 0x00, 0x87]);
    entry[27..29].copy_from_slice(&[0x9c, 0x7e]);
    entry[29] = 35;
    entry[30] = 0x40 | 40;
    if width == 44 {
        entry[33] = level;
        entry[34..36].copy_from_slice(&24u16.to_be_bytes());
        for (idx, stat) in [12u16, 11, 13, 12].iter().enumerate() {
            entry[36 + 2 * idx..38 + 2 * idx].copy_from_slice(&stat.to_be_bytes());
        }
    }
    entry
}

fn write_list(
    image: &mut [u8],
    field: &str,
    capacity: usize,
    width: usize,
    charset: &Charset,
    members: &[(u8, &str)],
) {
    let base = offset(field);
    image[base] = members.len() as u8;
    image[base + 1 + members.len()] = 0xff;
    let entries = base + 2 + capacity;
    let ot_names = entries + capacity * width;
    let names = ot_names + capacity * NAME_WIDTH;
    for (idx, (species, name)) in members.iter().enumerate() {
        image[base + 1 + idx] = *species;
        image[entries + idx * width..][..width].copy_from_slice(&creature(*species, 5 + idx as u8, width));
        image[ot_names + idx * NAME_WIDTH..][..NAME_WIDTH]
            .copy_from_slice(&charset.encode_field("RED", NAME_WIDTH).unwrap());
        image[names + idx * NAME_WIDTH..][..NAME_WIDTH]
            .copy_from_slice(&charset.encode_field(name, NAME_WIDTH).unwrap());
    }
}

/// A plausible mid-game save: named trainers, a few items, a party of two,
/// one populated box, and boxes the game has never initialized.
pub fn synthetic_save() -> Vec<u8> {
    let charset = Charset::rby_us();
    let mut image = vec![0u8; SAVE_SIZE];
    for (idx, byte) in image[..CHECKSUM_RANGE.start].iter_mut().enumerate() {
        *byte = (idx % 251) as u8;
    }

    image[offset("player_name")..][..NAME_WIDTH]
        .copy_from_slice(&charset.encode_field("RED", NAME_WIDTH).unwrap());
    image[offset("rival_name")..][..NAME_WIDTH]
        .copy_from_slice(&charset.encode_field("BLUE", NAME_WIDTH).unwrap());
    let pokedex = offset("pokedex_owned");
    image[pokedex] = 0b0000_0001;
    image[pokedex + 3] = 0b0000_0001;
    let seen = offset("pokedex_seen");
    image[seen] = 0b0000_0111;
    image[seen + 3] = 0b0000_0001;

    let pocket = offset("pocket_items");
    image[pocket..pocket + 6].copy_from_slice(&[2, 0x04, 5, 0x14, 3, 0xff]);
    let pc = offset("pc_items");
    image[pc..pc + 4].copy_from_slice(&[1, 0x14, 1, 0xff]);

    image[offset("money")..][..3].copy_from_slice(&[0x01, 0x23, 0x45]);
    image[offset("options")] = 0b0000_0011;
    image[offset("badges")] = 0b0000_0011;
    image[offset("player_id")..][..2].copy_from_slice(&4242u16.to_be_bytes());
    image[offset("current_box")] = 0x80;
    image[offset("casino_coins")..][..2].copy_from_slice(&[0x00, 0x50]);
    image[offset("play_time")..][..4].copy_from_slice(&[0x0c, 0x01, 0x22, 0x05]);

    write_list(
        &mut image,
        "party",
        6,
        44,
        &charset,
        &[(PIKACHU, "PIKACHU"), (BULBASAUR, "BULBASAUR")],
    );
    write_list(
        &mut image,
        "current_box_pokemon",
        20,
        33,
        &charset,
        &[(SQUIRTLE, "SQUIRTLE")],
    );
    write_list(&mut image, "box_1", 20, 33, &charset, &[(SQUIRTLE, "SQUIRTLE")]);
    write_list(&mut image, "box_2", 20, 33, &charset, &[]);
    for idx in 3..=12 {
        let base = offset(&format!("box_{idx}"));
        image[base..base + 1122].fill(0xff);
    }

    image[CHECKSUM_OFFSET] = checksum(&image[CHECKSUM_RANGE]);
    image
}
